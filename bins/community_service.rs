//! community-service entry point.

fn main() -> std::process::ExitCode {
    server::run_service("community-service", server::run_community_service)
}
