pub const GROUP_CREATED: &str = "GROUP_CREATED";
pub const GROUP_DELETED: &str = "GROUP_DELETED";
pub const MEMBER_JOINED: &str = "MEMBER_JOINED";
pub const MEMBER_LEFT: &str = "MEMBER_LEFT";
pub const EXPENSE_ADDED: &str = "EXPENSE_ADDED";
pub const EXPENSE_DELETED: &str = "EXPENSE_DELETED";
pub const TRANSACTION_ADDED: &str = "TRANSACTION_ADDED";
pub const SETTLEMENT_QUERIED: &str = "SETTLEMENT_QUERIED";
pub const SETTLEMENT_RECORDED: &str = "SETTLEMENT_RECORDED";
pub const SETTLEMENT_CONFIRMED: &str = "SETTLEMENT_CONFIRMED";

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 255;
pub const MAX_AMOUNT: i64 = 1_000_000;
