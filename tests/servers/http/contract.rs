use std::sync::Arc;
use std::time::Duration;

use boot::servers::http::server::HttpServer;
use boot_services::{Application, Context, Never, Parallel, Phase, Service};
use serde_json::{json, Value};

use crate::servers::http::environment::{Environment, Running, Stopped};

#[tokio::test]
async fn it_should_answer_the_health_check() {
    let env = Environment::<Running>::new().await;

    let response = reqwest::get(env.url("health_check")).await.expect("it should get a response");

    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.json::<Value>().await.unwrap(), json!({ "status": "Ok" }));

    env.stop().await.expect("it should stop the server");
}

#[tokio::test]
async fn it_should_answer_an_empty_object_on_the_root() {
    let env = Environment::<Running>::new().await;

    let response = reqwest::get(env.url("")).await.expect("it should get a response");

    assert_eq!(response.json::<Value>().await.unwrap(), json!({}));

    env.stop().await.expect("it should stop the server");
}

#[tokio::test]
async fn starting_twice_should_keep_the_same_socket() {
    let env = Environment::<Running>::new().await;

    env.server.start(&Context::new()).await.expect("it should start again");

    assert_eq!(env.server.local_addr().await, Some(env.state.local_addr));

    env.stop().await.expect("it should stop the server");
}

#[tokio::test]
async fn stopping_twice_should_do_nothing() {
    let env = Environment::<Running>::new().await;
    let local_addr = env.state.local_addr;

    let env = env.stop().await.expect("it should stop the server");

    assert_eq!(env.server.local_addr().await, None);
    env.server.stop(&Context::new()).await.expect("it should stop again");

    assert!(reqwest::get(format!("http://{local_addr}/health_check")).await.is_err());
}

#[tokio::test]
async fn it_should_fail_to_start_on_a_socket_that_is_taken() {
    let env = Environment::<Running>::new().await;

    let taken = Environment::<Stopped>::on(env.state.local_addr);
    let err = taken.server.start(&Context::new()).await.expect_err("the socket should be taken");

    assert!(matches!(
        err.find::<boot::servers::http::error::Error>(),
        Some(boot::servers::http::error::Error::FailedToBindToSocket { .. })
    ));
    assert_eq!(taken.server.local_addr().await, None);

    env.stop().await.expect("it should stop the server");
}

#[tokio::test]
async fn it_should_serve_while_the_application_runs() {
    let env = Environment::<Stopped>::new();
    let server: Arc<dyn Service> = env.server.clone();

    let app = Arc::new(Application::with_termination(
        Parallel::new(vec![server]),
        Duration::from_secs(5),
        Never,
    ));
    let mut phases = app.subscribe();

    let ctx = Context::new();
    let run = tokio::spawn({
        let app = app.clone();
        let ctx = ctx.clone();
        async move { app.run(&ctx).await }
    });

    phases.wait_for(|phase| *phase == Phase::Running).await.expect("it should reach running");

    let local_addr = env.server.local_addr().await.expect("it should be bound while running");
    let response = reqwest::get(format!("http://{local_addr}/health_check"))
        .await
        .expect("it should get a response");
    assert_eq!(response.status(), 200);

    ctx.cancel();

    run.await.expect("it should join").expect("it should run cleanly");
    assert_eq!(env.server.local_addr().await, None);
}
