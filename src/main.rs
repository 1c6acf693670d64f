fn main() {
    if let Err(e) = app_lib::run() {
        eprintln!("错误: {:#}", e);
        std::process::exit(1);
    }
}
