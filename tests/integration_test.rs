use std::time::Duration;

use paa_collector::services::locator;
use paa_collector::workflow::QueryOutcome;
use paa_collector::{
    launch_browser, Config, JsExecutor, LocaleParams, QueryCtx, QueryFlow, SelectorRole,
};

#[tokio::test]
#[ignore] // 默认忽略，需要本机装有 Chrome/Chromium：cargo test -- --ignored
async fn test_browser_launch() {
    paa_collector::utils::logging::init();

    let config = Config::default();
    let result = launch_browser(&config).await;

    assert!(result.is_ok(), "应该能够成功启动浏览器");
}

#[tokio::test]
#[ignore]
async fn test_locate_container_on_blank_page() {
    let config = Config {
        headless: true,
        ..Config::default()
    };
    let (_browser, page) = launch_browser(&config).await.expect("启动浏览器失败");

    // 空白页上定位不到 PAA 容器，应返回 None 而不是报错
    let container = locator::locate(&page, SelectorRole::Container, Duration::from_secs(1)).await;
    assert!(container.is_none());
}

#[tokio::test]
#[ignore]
async fn test_single_query_flow() {
    paa_collector::utils::logging::init();

    let config = Config {
        headless: true,
        max_clicks: 3,
        ..Config::default()
    };
    let (_browser, page) = launch_browser(&config).await.expect("启动浏览器失败");
    let executor = JsExecutor::new(page);

    let flow = QueryFlow::new(&config);
    let ctx = QueryCtx::new(
        "what is rust".to_string(),
        1,
        1,
        LocaleParams::new("en", "us"),
    );

    // 真实网络环境下三种结果都可能：有组件、无组件、被验证拦截
    let outcome = flow.run(&executor, &ctx).await.expect("处理查询失败");
    match outcome {
        QueryOutcome::Harvested(pairs) => {
            assert!(pairs.len() <= config.max_clicks);
            println!("采到 {} 个问答对", pairs.len());
        }
        QueryOutcome::Empty => println!("页面上没有 PAA 组件"),
        QueryOutcome::Blocked => println!("被验证拦截"),
    }
}
