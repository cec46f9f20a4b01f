use std::process::ExitCode;

fn main() -> ExitCode {
    match text_normalizer_lib::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("错误: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
