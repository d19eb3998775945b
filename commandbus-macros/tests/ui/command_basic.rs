use commandbus::command::Command;
use commandbus_macros::Command;
use serde::Serialize;

#[derive(Debug, Serialize, Command)]
struct CreateUser {
    name: String,
}

#[derive(Debug, Serialize, Command)]
enum Toggle {
    On,
    Off,
}

#[derive(Debug, Serialize, Command)]
struct Wrap<T: Serialize + Send + Sync + 'static> {
    inner: T,
}

fn main() {
    assert_eq!(CreateUser::NAME, "CreateUser");
    assert_eq!(Toggle::NAME, "Toggle");
    assert_eq!(<Wrap<u8> as Command>::NAME, "Wrap");
}
