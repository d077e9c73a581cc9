mod local_upload_store_test;
