use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use domain::VisitorId;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

/// 调用方的访客标识：X-Forwarded-For 第一项，其次 X-Real-IP，最后是 TCP 对端地址
pub struct Visitor(pub VisitorId);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Visitor {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Ok(Visitor(resolve(&parts.headers, peer)))
    }
}

fn resolve(headers: &HeaderMap, peer: Option<IpAddr>) -> VisitorId {
    let forwarded = header(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .and_then(parse_ip);
    let real_ip = header(headers, "x-real-ip").and_then(parse_ip);

    let ip = forwarded.or(real_ip).or(peer).map(|ip| ip.to_string());
    VisitorId::from_address(ip.as_deref())
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn parse_ip(raw: &str) -> Option<IpAddr> {
    raw.trim().parse().ok()
}
