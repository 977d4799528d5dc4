// Property tests, grouped like src/; fixtures come from integration_tests::_support
mod cache;
mod pool;
