//! Built-in catalog of OpenAI-compatible chat and embedding providers.

/// Default chat provider when neither the caller nor `LLM_PROVIDER` names one.
pub const DEFAULT_CHAT_PROVIDER: &str = "qwen";

/// Default embedding provider when neither the caller nor `EMBEDDING_PROVIDER` names one.
pub const DEFAULT_EMBEDDING_PROVIDER: &str = "dashscope";

/// Chat provider entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatProviderSpec {
    pub name: &'static str,
    pub base_url: &'static str,
    pub models: &'static [&'static str],
    pub default_model: &'static str,
    /// Environment variable holding the API key.
    pub env_key: &'static str,
}

/// Embedding provider entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddingProviderSpec {
    pub name: &'static str,
    pub base_url: &'static str,
    pub models: &'static [&'static str],
    pub default_model: &'static str,
    pub env_key: &'static str,
    /// Vector size of the default model.
    pub dimensions: usize,
}

pub const CHAT_PROVIDERS: &[ChatProviderSpec] = &[
    ChatProviderSpec {
        name: "qwen",
        base_url: "https://dashscope.aliyuncs.com/compatible-mode/v1",
        models: &["qwen-turbo", "qwen-plus", "qwen-max", "qwen2.5-32b-instruct"],
        default_model: "qwen2.5-32b-instruct",
        env_key: "DASHSCOPE_API_KEY",
    },
    ChatProviderSpec {
        name: "deepseek",
        base_url: "https://api.deepseek.com/v1",
        models: &["deepseek-chat", "deepseek-reasoner"],
        default_model: "deepseek-chat",
        env_key: "DEEPSEEK_API_KEY",
    },
    ChatProviderSpec {
        name: "moonshot",
        base_url: "https://api.moonshot.cn/v1",
        models: &["moonshot-v1-8k", "moonshot-v1-32k", "moonshot-v1-128k"],
        default_model: "moonshot-v1-8k",
        env_key: "MOONSHOT_API_KEY",
    },
    ChatProviderSpec {
        name: "zhipu",
        base_url: "https://open.bigmodel.cn/api/paas/v4",
        models: &["glm-4", "glm-4-flash", "glm-4-plus"],
        default_model: "glm-4-flash",
        env_key: "ZHIPU_API_KEY",
    },
    ChatProviderSpec {
        name: "openai",
        base_url: "https://api.openai.com/v1",
        models: &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo"],
        default_model: "gpt-4o-mini",
        env_key: "OPENAI_API_KEY",
    },
];

pub const EMBEDDING_PROVIDERS: &[EmbeddingProviderSpec] = &[
    EmbeddingProviderSpec {
        name: "dashscope",
        base_url: "https://dashscope.aliyuncs.com/compatible-mode/v1",
        models: &["text-embedding-v3", "text-embedding-v2", "text-embedding-v1"],
        default_model: "text-embedding-v3",
        env_key: "DASHSCOPE_API_KEY",
        dimensions: 1024,
    },
    EmbeddingProviderSpec {
        name: "openai",
        base_url: "https://api.openai.com/v1",
        models: &[
            "text-embedding-3-small",
            "text-embedding-3-large",
            "text-embedding-ada-002",
        ],
        default_model: "text-embedding-3-small",
        env_key: "OPENAI_API_KEY",
        dimensions: 1536,
    },
    EmbeddingProviderSpec {
        name: "zhipu",
        base_url: "https://open.bigmodel.cn/api/paas/v4",
        models: &["embedding-3", "embedding-2"],
        default_model: "embedding-3",
        env_key: "ZHIPU_API_KEY",
        dimensions: 2048,
    },
];

/// Look up a chat provider by (case-insensitive) name.
pub fn find_chat_provider(name: &str) -> Option<&'static ChatProviderSpec> {
    let name = name.trim().to_lowercase();
    CHAT_PROVIDERS.iter().find(|spec| spec.name == name)
}

/// Look up an embedding provider by (case-insensitive) name.
pub fn find_embedding_provider(name: &str) -> Option<&'static EmbeddingProviderSpec> {
    let name = name.trim().to_lowercase();
    EMBEDDING_PROVIDERS.iter().find(|spec| spec.name == name)
}

pub fn chat_provider_names() -> Vec<&'static str> {
    CHAT_PROVIDERS.iter().map(|spec| spec.name).collect()
}

pub fn embedding_provider_names() -> Vec<&'static str> {
    EMBEDDING_PROVIDERS.iter().map(|spec| spec.name).collect()
}
