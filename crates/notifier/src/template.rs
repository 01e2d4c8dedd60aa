/// Body sent for every due notification; `{wallet_id}` is substituted.
pub const DEFAULT_MESSAGE_TEMPLATE: &str =
    "Warning. Your health ratio is too low for wallet_id {wallet_id}";

/// Render the notification text for a wallet.
pub fn render_message(wallet_id: &str) -> String {
    DEFAULT_MESSAGE_TEMPLATE.replace("{wallet_id}", wallet_id)
}
