mod channel_tests;
mod redis_queue_tests;
