mod analytics_tests;
mod common;
