/**
 * Channel Message Routes
 *
 * Read routes are served by the orchestrated read path (cache first, store
 * behind the stampede lock); write routes hit the store and then fire the
 * cache invalidation hooks.
 *
 * # Routes
 *
 * ## Reads
 * - `GET /channels/{channel_id}/messages` - Page of messages, latest first
 * - `GET /channels/{channel_id}/messages/anchor/{anchor_id}` - Anchor-relative page
 *
 * ## Writes
 * - `POST /channels/{channel_id}/messages` - Send a message
 * - `PATCH /channels/{channel_id}/messages/{message_id}` - Edit a message
 * - `DELETE /channels/{channel_id}/messages/{message_id}` - Soft-delete a message
 */

use axum::Router;

use crate::backend::messages::handlers::{
    delete_message, edit_message, get_channel_messages, get_messages_from_anchor, send_message,
};
use crate::backend::server::state::AppState;

/// Configure channel message routes
pub fn configure_message_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/channels/{channel_id}/messages",
            axum::routing::get(get_channel_messages).post(send_message),
        )
        .route(
            "/channels/{channel_id}/messages/anchor/{anchor_id}",
            axum::routing::get(get_messages_from_anchor),
        )
        .route(
            "/channels/{channel_id}/messages/{message_id}",
            axum::routing::patch(edit_message).delete(delete_message),
        )
}
