use commandbus::Command;

#[derive(Command)]
#[command(name = "open-account")]
struct OpenAccount;

fn main() {}
