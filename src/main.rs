fn main() -> std::process::ExitCode {
    creative_check_lib::run()
}
