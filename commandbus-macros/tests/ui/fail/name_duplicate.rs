use commandbus::Command;

#[derive(Command)]
#[command(name = "Open", name = "Close")]
struct OpenAccount;

fn main() {}
