pub struct Health {
    pub ready: bool,
    pub store_configured: bool,
}

impl Health {
    pub fn readiness(store_configured: bool) -> Self {
        Self {
            ready: true,
            store_configured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readiness_ok() {
        let h = Health::readiness(true);
        assert!(h.ready);
        assert!(h.store_configured);
    }

    #[test]
    fn readiness_tracks_missing_store() {
        let h = Health::readiness(false);
        assert!(h.ready);
        assert!(!h.store_configured);
    }
}
