mod stats_query_repository;

pub use stats_query_repository::StatsQueryRepository;
