pub mod application {
    pub mod tasks;
    pub mod product {
        pub mod get_all;
        pub mod ingest;
        pub mod repopulate;
    }
}

pub mod domain {
    pub mod errors;
    pub mod logger;
    pub mod tasks;
    pub mod product {
        pub mod cache;
        pub mod errors;
        pub mod ingestion;
        pub mod model;
        pub mod repository;
        pub mod source;
        pub mod value_objects;
        pub mod use_cases {
            pub mod get_all;
            pub mod ingest;
        }
    }
}

#[cfg(test)]
mod test_support;
