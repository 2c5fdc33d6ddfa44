pub type JobIconsResult<T> = Result<T, JobIconsError>;

#[derive(thiserror::Error, Debug)]
pub enum JobIconsError {
    #[error("api error: {0}")]
    Api(String),

    #[error("blend error: {0}")]
    Blend(String),

    #[error("image error: {0}")]
    Image(String),

    #[error("descriptor error: {0}")]
    Descriptor(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl JobIconsError {
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    pub fn blend(msg: impl Into<String>) -> Self {
        Self::Blend(msg.into())
    }

    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    pub fn descriptor(msg: impl Into<String>) -> Self {
        Self::Descriptor(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(JobIconsError::api("x").to_string().contains("api error:"));
        assert!(
            JobIconsError::blend("x")
                .to_string()
                .contains("blend error:")
        );
        assert!(
            JobIconsError::image("x")
                .to_string()
                .contains("image error:")
        );
        assert!(
            JobIconsError::descriptor("x")
                .to_string()
                .contains("descriptor error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = JobIconsError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
