//! auth-service entry point.

fn main() -> std::process::ExitCode {
    server::run_service("auth-service", server::run_auth_service)
}
