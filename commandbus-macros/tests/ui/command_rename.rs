use commandbus::command::Command;
use commandbus_macros::Command;
use serde::Serialize;

#[derive(Debug, Serialize, Command)]
#[command(name = "close_order")]
struct CloseOrderV2 {
    order_id: u64,
}

fn main() {
    assert_eq!(CloseOrderV2::NAME, "close_order");
}
