use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub fn create_main_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("Connect", "connect"),
            InlineKeyboardButton::callback("Tokens", "tokens"),
        ],
        vec![
            InlineKeyboardButton::callback("From", "from"),
            InlineKeyboardButton::callback("To", "to"),
            InlineKeyboardButton::callback("Amount", "amount"),
        ],
        vec![
            InlineKeyboardButton::callback("Rate", "rate"),
            InlineKeyboardButton::callback("🔄 Swap", "swap"),
        ],
        vec![
            InlineKeyboardButton::callback("Help", "help"),
            InlineKeyboardButton::callback("Owner", "owner"),
        ],
    ])
}
