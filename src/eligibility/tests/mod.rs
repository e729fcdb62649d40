mod challenge;
mod common;
mod concurrency;
