pub mod reply_router;
