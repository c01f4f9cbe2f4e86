//! user-service entry point.

fn main() -> std::process::ExitCode {
    server::run_service("user-service", server::run_user_service)
}
