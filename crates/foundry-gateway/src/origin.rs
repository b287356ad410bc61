//! CloudFront origins backed by S3 buckets or by the REST API itself.

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};

use crate::deferred::Deferred;
use crate::error::BuildError;

/// What an origin needs from whatever stores the site content.
pub trait StorageBacking: Send + Sync {
    fn arn(&self) -> Deferred;
    fn id(&self) -> Deferred;
    fn regional_domain_name(&self) -> Deferred;
}

/// A plain S3 bucket.
#[derive(Debug, Clone)]
pub struct Bucket {
    arn: Deferred,
    id: Deferred,
    regional_domain_name: Deferred,
}

impl Bucket {
    pub fn new(arn: Deferred, id: Deferred, regional_domain_name: Deferred) -> Self {
        Self {
            arn,
            id,
            regional_domain_name,
        }
    }

    /// A bucket that already exists under `bucket_name` in `region`.
    pub fn existing(bucket_name: &str, region: &str) -> Self {
        Self {
            arn: Deferred::resolved("bucket arn", format!("arn:aws:s3:::{bucket_name}")),
            id: Deferred::resolved("bucket id", bucket_name),
            regional_domain_name: Deferred::resolved(
                "bucket regional domain name",
                format!("{bucket_name}.s3.{region}.amazonaws.com"),
            ),
        }
    }
}

impl StorageBacking for Bucket {
    fn arn(&self) -> Deferred {
        self.arn.clone()
    }

    fn id(&self) -> Deferred {
        self.id.clone()
    }

    fn regional_domain_name(&self) -> Deferred {
        self.regional_domain_name.clone()
    }
}

/// A bucket configured for static site hosting.
#[derive(Debug, Clone)]
pub struct SiteBucket {
    pub bucket: Bucket,
    pub index_document: String,
}

impl SiteBucket {
    pub fn new(bucket: Bucket) -> Self {
        Self {
            bucket,
            index_document: "index.html".to_string(),
        }
    }
}

impl StorageBacking for SiteBucket {
    fn arn(&self) -> Deferred {
        self.bucket.arn()
    }

    fn id(&self) -> Deferred {
        self.bucket.id()
    }

    fn regional_domain_name(&self) -> Deferred {
        self.bucket.regional_domain_name()
    }
}

/// Backing store names accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackingKind {
    Bucket,
    SiteBucket,
}

impl FromStr for BackingKind {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bucket" => Ok(BackingKind::Bucket),
            "site_bucket" | "site-bucket" => Ok(BackingKind::SiteBucket),
            other => Err(BuildError::InvalidBucketOrOriginType(other.to_string())),
        }
    }
}

impl BackingKind {
    pub fn existing(self, bucket_name: &str, region: &str) -> Arc<dyn StorageBacking> {
        let bucket = Bucket::existing(bucket_name, region);
        match self {
            BackingKind::Bucket => Arc::new(bucket),
            BackingKind::SiteBucket => Arc::new(SiteBucket::new(bucket)),
        }
    }
}

/// The CloudFront identity allowed to read the bucket.
#[derive(Debug, Clone)]
pub struct OriginAccessIdentity {
    pub iam_arn: Deferred,
    pub cloudfront_access_identity_path: Deferred,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginShield {
    pub enabled: bool,
    pub origin_shield_region: String,
}

impl OriginShield {
    fn for_region(region: Option<&str>) -> Option<Self> {
        region.map(|r| OriginShield {
            enabled: true,
            origin_shield_region: r.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SiteOriginArgs {
    pub name: String,
    pub origin_path: String,
    pub origin_shield_region: Option<String>,
    pub is_target_origin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteOrigin {
    pub origin_id: String,
    pub domain_name: String,
    pub origin_path: String,
    pub origin_access_identity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_shield: Option<OriginShield>,
    pub is_target_origin: bool,
    /// Bucket the policy below attaches to.
    pub bucket_id: String,
    pub bucket_policy: Value,
}

/// Wire a bucket-backed origin, waiting for the bucket and identity
/// identifiers it depends on.
pub async fn site_origin(
    name: &str,
    args: &SiteOriginArgs,
    backing: &dyn StorageBacking,
    identity: &OriginAccessIdentity,
) -> Result<SiteOrigin, BuildError> {
    let (bucket_arn, bucket_id, domain_name, iam_arn, identity_path) = futures::try_join!(
        backing.arn().get(),
        backing.id().get(),
        backing.regional_domain_name().get(),
        identity.iam_arn.get(),
        identity.cloudfront_access_identity_path.get()
    )?;

    let bucket_policy = json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": { "Service": "delivery.logs.amazonaws.com" },
                "Action": "s3:PutObject",
                "Resource": format!("{bucket_arn}/logs/*"),
            },
            {
                "Effect": "Allow",
                "Principal": { "AWS": iam_arn },
                "Action": "s3:GetObject",
                "Resource": format!("{bucket_arn}/*"),
            },
        ],
    });

    Ok(SiteOrigin {
        origin_id: format!("{name}-{}-site", args.name),
        domain_name,
        origin_path: args.origin_path.clone(),
        origin_access_identity: identity_path,
        origin_shield: OriginShield::for_region(args.origin_shield_region.as_deref()),
        is_target_origin: args.is_target_origin,
        bucket_id,
        bucket_policy,
    })
}

#[derive(Debug, Clone, Default)]
pub struct ApiOriginArgs {
    pub domain_name: String,
    pub path_pattern: String,
    pub origin_path: String,
    pub origin_shield_region: Option<String>,
    /// Sent as `X-API-Key` so the gateway can reject direct traffic.
    pub api_key_password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomOriginConfig {
    pub http_port: u16,
    pub https_port: u16,
    pub origin_protocol_policy: String,
    pub origin_ssl_protocols: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheBehavior {
    pub path_pattern: String,
    pub allowed_methods: Vec<String>,
    pub cached_methods: Vec<String>,
    pub target_origin_id: String,
    pub query_string: bool,
    pub forwarded_headers: Vec<String>,
    pub forward_cookies: String,
    pub min_ttl: u32,
    pub default_ttl: u32,
    pub max_ttl: u32,
    pub compress: bool,
    pub viewer_protocol_policy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOrigin {
    pub origin_id: String,
    pub domain_name: String,
    pub origin_path: String,
    pub custom_origin_config: CustomOriginConfig,
    pub custom_headers: Vec<CustomHeader>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_shield: Option<OriginShield>,
    pub cache_behavior: CacheBehavior,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// An HTTPS-only origin in front of the REST API that never caches.
pub fn api_origin(name: &str, args: &ApiOriginArgs) -> ApiOrigin {
    let origin_id = format!("{name}-api");
    let custom_headers = args
        .api_key_password
        .iter()
        .map(|password| CustomHeader {
            name: "X-API-Key".to_string(),
            value: password.clone(),
        })
        .collect();

    ApiOrigin {
        domain_name: args.domain_name.clone(),
        origin_path: args.origin_path.clone(),
        custom_origin_config: CustomOriginConfig {
            http_port: 80,
            https_port: 443,
            origin_protocol_policy: "https-only".to_string(),
            origin_ssl_protocols: strings(&["TLSv1.2"]),
        },
        custom_headers,
        origin_shield: OriginShield::for_region(args.origin_shield_region.as_deref()),
        cache_behavior: CacheBehavior {
            path_pattern: args.path_pattern.clone(),
            allowed_methods: strings(&["DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT"]),
            cached_methods: strings(&["GET", "HEAD"]),
            target_origin_id: origin_id.clone(),
            query_string: true,
            forwarded_headers: strings(&[
                "Authorization",
                "Sec-WebSocket-Key",
                "Sec-WebSocket-Version",
                "Sec-WebSocket-Protocol",
                "Sec-WebSocket-Accept",
                "Sec-WebSocket-Extensions",
                "Accept-Encoding",
            ]),
            forward_cookies: "none".to_string(),
            min_ttl: 0,
            default_ttl: 0,
            max_ttl: 0,
            compress: true,
            viewer_protocol_policy: "https-only".to_string(),
        },
        origin_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> OriginAccessIdentity {
        OriginAccessIdentity {
            iam_arn: Deferred::resolved("oai iam arn", "arn:aws:iam::cloudfront:user/OAI"),
            cloudfront_access_identity_path: Deferred::resolved(
                "oai path",
                "origin-access-identity/cloudfront/OAI",
            ),
        }
    }

    #[test]
    fn test_unknown_backing_kind_is_rejected() {
        let err = "dynamodb".parse::<BackingKind>().unwrap_err();
        assert!(matches!(err, BuildError::InvalidBucketOrOriginType(ref k) if k == "dynamodb"));
        assert_eq!("site_bucket".parse::<BackingKind>().unwrap(), BackingKind::SiteBucket);
    }

    #[tokio::test]
    async fn test_site_origin_from_site_bucket() {
        let backing = BackingKind::SiteBucket.existing("www-site", "us-east-1");
        let args = SiteOriginArgs {
            name: "www".to_string(),
            origin_shield_region: Some("us-east-1".to_string()),
            ..Default::default()
        };
        let origin = site_origin("cdn", &args, backing.as_ref(), &identity())
            .await
            .unwrap();

        assert_eq!(origin.origin_id, "cdn-www-site");
        assert_eq!(origin.domain_name, "www-site.s3.us-east-1.amazonaws.com");
        assert_eq!(origin.bucket_id, "www-site");
        assert_eq!(
            origin.origin_access_identity,
            "origin-access-identity/cloudfront/OAI"
        );
        assert_eq!(
            origin.origin_shield.as_ref().map(|s| s.origin_shield_region.as_str()),
            Some("us-east-1")
        );
        assert_eq!(
            origin.bucket_policy["Statement"][1]["Resource"],
            "arn:aws:s3:::www-site/*"
        );
        assert_eq!(
            origin.bucket_policy["Statement"][0]["Resource"],
            "arn:aws:s3:::www-site/logs/*"
        );
    }

    #[tokio::test]
    async fn test_site_origin_propagates_resolution_failure() {
        let bucket = Bucket::new(
            Deferred::failed("bucket arn", "bucket not created"),
            Deferred::resolved("bucket id", "b"),
            Deferred::resolved("domain", "b.s3.amazonaws.com"),
        );
        let err = site_origin("cdn", &SiteOriginArgs::default(), &bucket, &identity())
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::ResolutionFailed(_)));
    }

    #[test]
    fn test_api_origin_with_key() {
        let origin = api_origin(
            "gateway",
            &ApiOriginArgs {
                domain_name: "abc.execute-api.us-east-1.amazonaws.com".to_string(),
                path_pattern: "/api/*".to_string(),
                api_key_password: Some("secret".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(origin.origin_id, "gateway-api");
        assert_eq!(origin.cache_behavior.target_origin_id, "gateway-api");
        assert_eq!(origin.custom_headers.len(), 1);
        assert_eq!(origin.custom_headers[0].name, "X-API-Key");
        assert!(origin.origin_shield.is_none());
        assert_eq!(origin.cache_behavior.default_ttl, 0);
    }
}
