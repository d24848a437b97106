//! Custom resource types managed by other operators that esmove reads and writes

mod elasticsearch;

pub use elasticsearch::{
    Elasticsearch, ElasticsearchSpec, ElasticsearchStatus, CLUSTER_NAME_LABEL,
    CLUSTER_UUID_ANNOTATION,
};
