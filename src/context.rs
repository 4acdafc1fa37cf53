use indexmap::IndexMap;

/// What a builtin may read besides its input and arguments.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    pub env: IndexMap<String, String>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the process environment, taken once.
    pub fn from_process() -> Self {
        let env = std::env::vars_os()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.to_string_lossy().into_owned(),
                )
            })
            .collect();
        CallContext { env }
    }

    pub fn with_env(env: IndexMap<String, String>) -> Self {
        CallContext { env }
    }

    pub fn with_var(&self, name: &str, value: &str) -> Self {
        let mut ctx = self.clone();
        ctx.env.insert(name.to_string(), value.to_string());
        ctx
    }
}
