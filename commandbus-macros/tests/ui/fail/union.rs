use commandbus::Command;

#[derive(Command)]
union Number {
    int: u32,
    float: f32,
}

fn main() {}
