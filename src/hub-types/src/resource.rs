/// Where a kind lives on the api server: `/apis/{group}/{version}/.../{plural}`.
/// Kinds of the core group are served under `/api/{version}` instead.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ApiResource {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
    pub plural: &'static str,
}

impl ApiResource {
    pub const fn core(kind: &'static str, plural: &'static str) -> Self {
        Self {
            group: "",
            version: "v1",
            kind,
            plural,
        }
    }

    pub const fn grouped(group: &'static str, kind: &'static str, plural: &'static str) -> Self {
        Self {
            group,
            version: "v1",
            kind,
            plural,
        }
    }

    pub fn is_core(&self) -> bool {
        self.group.is_empty()
    }

    /// value of `apiVersion` for objects of this kind
    pub fn api_version(&self) -> String {
        if self.is_core() {
            self.version.to_owned()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// path segment under the host, up to the version
    pub fn api_prefix(&self) -> String {
        if self.is_core() {
            format!("api/{}", self.version)
        } else {
            format!("apis/{}/{}", self.group, self.version)
        }
    }
}
