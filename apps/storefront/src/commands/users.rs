//! User administration.

use tracing::{debug, info};

use crate::storefront::{Storefront, WriteStatus};

impl Storefront {
    /// Deletes a user record. Their orders and wishlist are kept. Deleting
    /// the signed-in user also signs them out.
    pub async fn delete_user(&self, user_id: &str) -> WriteStatus {
        if self.users.find(|u| u.id == user_id).is_none() {
            debug!(user_id, "delete_user: unknown user");
            return WriteStatus::Skipped;
        }

        info!(user_id, "Deleting user");
        let status = self.erase(&self.users, user_id).await;
        if status.is_saved() && self.current_user().is_some_and(|u| u.id == user_id) {
            self.logout();
        }
        status
    }
}
