use proc_macro::TokenStream;

mod command;

/// 命令派生宏
/// - 为结构体/枚举实现 `::commandbus::command::Command`
/// - `NAME` 默认取类型名，可通过 `#[command(name = "...")]` 覆写
/// - 名称须以 ASCII 字母开头，仅包含 ASCII 字母数字或 `_`，否则编译期报错
#[proc_macro_derive(Command, attributes(command))]
pub fn derive_command(input: TokenStream) -> TokenStream {
    command::expand(input)
}
