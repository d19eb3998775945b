use commandbus::Command;

#[derive(Command)]
#[command(name = "")]
struct Anonymous;

fn main() {}
