use std::process::ExitCode;

fn main() -> ExitCode {
    lcon::lib_main()
}
