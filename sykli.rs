//! Sykli CI pipeline for tom-frontend
//!
//! Run locally: sykli run
//! Or: cargo run --bin sykli --features sykli -- --emit | sykli run -

use sykli::{Condition, Pipeline, Template};

fn main() {
    let mut p = Pipeline::new();

    // === RESOURCES ===
    let src = p.dir(".");
    let cargo_registry = p.cache("cargo-registry");
    let cargo_git = p.cache("cargo-git");
    let target_cache = p.cache("target");

    // === TEMPLATE ===
    let rust = Template::new()
        .container("rust:1.85")
        .mount_dir(&src, "/src")
        .mount_cache(&cargo_registry, "/usr/local/cargo/registry")
        .mount_cache(&cargo_git, "/usr/local/cargo/git")
        .mount_cache(&target_cache, "/src/target")
        .workdir("/src");

    // === TASKS ===

    let _ = p
        .task("test")
        .from(&rust)
        .run("cargo test --all-features")
        .inputs(&["**/*.rs", "Cargo.toml", "Cargo.lock"]);

    let _ = p
        .task("lint")
        .from(&rust)
        .run("cargo clippy --all-targets --all-features -- -D warnings")
        .inputs(&["**/*.rs", "Cargo.toml", "Cargo.lock"]);

    let _ = p
        .task("fmt")
        .from(&rust)
        .run("cargo fmt -- --check")
        .inputs(&["**/*.rs"]);

    let _ = p
        .task("build")
        .from(&rust)
        .run("cargo build --release --bin tom-frontend")
        .inputs(&["**/*.rs", "Cargo.toml", "Cargo.lock"])
        .output("binary", "target/release/tom-frontend")
        .after(&["test", "lint", "fmt"]);

    // Smoke test against a kind cluster: probes must come up and the page
    // must answer 500 while the backend Service has no endpoints
    let _ = p
        .task("integration-test")
        .container("ghcr.io/sykli/kind-runner:latest")
        .mount(&src, "/src")
        .workdir("/src")
        .run(
            r#"#!/bin/bash
set -e

kind create cluster --name tom-frontend-ci
kubectl create namespace demo || true
kubectl create service clusterip tom-backend --tcp=8080:8080 -n demo

BACKEND_SERVICE=tom-backend POD_NAMESPACE=demo PORT=18080 RUST_LOG=info \
  ./target/release/tom-frontend > /tmp/frontend-log.txt 2>&1 &
FRONTEND_PID=$!
sleep 3

curl -fsS http://127.0.0.1:18080/liveness
curl -fsS http://127.0.0.1:18080/startup

STATUS=$(curl -s -o /dev/null -w '%{http_code}' http://127.0.0.1:18080/)
if [ "$STATUS" != "500" ]; then
  echo "ERROR: expected 500 for a Service without endpoints, got $STATUS"
  cat /tmp/frontend-log.txt
  exit 1
fi

kill -TERM $FRONTEND_PID
wait $FRONTEND_PID
grep -q "server exited properly" /tmp/frontend-log.txt

echo "Integration tests passed"
kind delete cluster --name tom-frontend-ci || true
"#,
        )
        .input_from("build", "binary", "/src/target/release/tom-frontend")
        .when_cond(Condition::event("push").or(Condition::negate(Condition::branch("*"))))
        .timeout(600);

    p.emit();
}
