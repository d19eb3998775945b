use commandbus::Command;

#[derive(Command)]
#[command(rename = "Open")]
struct OpenAccount;

fn main() {}
