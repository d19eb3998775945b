use commandbus::Command;

#[derive(Command)]
#[command(name = "9lives")]
struct Resurrect;

fn main() {}
