mod upload_api_test;
