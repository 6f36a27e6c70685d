pub mod protocol;
pub mod rest;
pub mod state;

// Re-export the handlers to make them easily accessible
// to the binary that builds the web server router.
pub use rest::{
    add_manual_product_handler, delete_product_handler, get_history_handler,
    get_routine_handler, list_categories_handler, list_shelf_handler, log_routine_handler,
    scan_product_handler, share_routine_handler,
};
