//! Account pages

use crate::api::User;

/// Profile page for the signed-in user
pub fn render_profile(user: &User) -> String {
    [
        "Your Profile".to_string(),
        String::new(),
        format!("Username: {}", user.username),
        format!("Email:    {}", user.email),
        format!("Role:     {}", user.role),
        format!("User ID:  {}", user.id),
    ]
    .join("\n")
}
