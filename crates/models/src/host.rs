use std::net::Ipv4Addr;

/// Where a request arriving on a course subdomain should be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdomainTarget {
    /// Slug of the course named by the first host label
    pub slug: String,
    /// The host with its first label stripped
    pub parent_host: String,
}

impl SubdomainTarget {
    /// Label that never names a course
    const RESERVED_LABEL: &'static str = "www";

    /// Splits a host into labels and decides whether it names a course
    ///
    /// Hosts with more than two labels whose first label is not `www` map to
    /// the course with that slug. Everything else passes through, including
    /// IPv4 literals.
    pub fn parse(host: &str) -> Option<Self> {
        let hostname = host.rsplit_once(':').map_or(host, |(name, _)| name);
        if hostname.parse::<Ipv4Addr>().is_ok() {
            return None;
        }

        let labels: Vec<&str> = host.split('.').collect();

        if labels.len() <= 2 || labels[0] == Self::RESERVED_LABEL {
            return None;
        }

        Some(Self {
            slug: labels[0].to_owned(),
            parent_host: labels[1..].join("."),
        })
    }

    /// Absolute address of the course detail page on the parent domain
    pub fn redirect_url(&self, scheme: &str, detail_path: &str) -> String {
        format!("{scheme}://{}{detail_path}", self.parent_host)
    }
}

/// Path of the course detail page for a slug
pub fn course_detail_path(slug: &str) -> String {
    format!("/course/{slug}/")
}
