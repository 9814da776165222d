pub mod local_object_store;
