//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;

use msgraph_domains::{ClientConfig, DomainsClient, GraphError, odata::Query};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 生成唯一的测试域名（不会真实解析，仅用于注册/删除生命周期测试）
pub fn generate_test_domain_name() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("test-{}.example.com", &uuid.to_string()[..8])
}

/// 测试上下文 - 封装客户端和测试域名
pub struct TestContext {
    pub client: DomainsClient,
    pub domain: String,
}

impl TestContext {
    /// 从环境变量创建测试上下文
    ///
    /// 必需: `MSGRAPH_TENANT_ID`、`MSGRAPH_ACCESS_TOKEN`、`TEST_DOMAIN`
    /// 可选: `MSGRAPH_ENDPOINT`（默认官方端点）
    pub fn from_env() -> Option<Self> {
        let tenant_id = env::var("MSGRAPH_TENANT_ID").ok()?;
        let access_token = env::var("MSGRAPH_ACCESS_TOKEN").ok()?;
        let domain = env::var("TEST_DOMAIN").ok()?;

        let mut config = ClientConfig::new(tenant_id, access_token);
        if let Ok(endpoint) = env::var("MSGRAPH_ENDPOINT") {
            config = config.with_endpoint(endpoint);
        }

        Some(Self {
            client: DomainsClient::new(config),
            domain,
        })
    }

    /// 确认测试域名存在于租户中
    pub async fn domain_exists(&self) -> bool {
        self.client.get(&self.domain, Query::default()).await.is_ok()
    }

    /// 清理测试域名（注册/验证测试的残留）
    pub async fn cleanup_domain(&self, domain_id: &str) {
        let _ = self.client.delete(domain_id).await;
    }

    /// 查找并清理所有残留的测试域名（以 test- 开头且未验证的域名）
    pub async fn cleanup_all_test_domains(&self) {
        if let Ok(response) = self.client.list(Query::default()).await {
            for domain in response.value {
                let Some(id) = domain.id else { continue };
                if id.starts_with("test-") && domain.is_verified != Some(true) {
                    let _ = self.client.delete(&id).await;
                }
            }
        }
    }
}

/// 判断错误是否为“域名不存在”（用于生命周期测试的最终断言）
pub fn is_not_found(error: &GraphError) -> bool {
    matches!(error, GraphError::DomainNotFound { .. })
}
