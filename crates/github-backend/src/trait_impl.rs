//! Implementation of labelsync-core traits for GitHubClient

use labelsync_core::{
    Label, LabelMutation, LabelRemote, Lookup, Organization, PageResponse, RateLimit, Repository,
    Result, SyncError,
};

use crate::client::GitHubClient;
use crate::convert::{
    label_to_core, mutation_from_core, node_page_to_core, organization_to_core,
    rate_limit_to_core, repository_to_core, MutationInput,
};

impl LabelRemote for GitHubClient {
    fn rate_limit(&self) -> Result<RateLimit> {
        let rate_limit = self.get_rate_limit().map_err(SyncError::from)?;
        Ok(rate_limit_to_core(rate_limit))
    }

    fn find_organization(&self, login: &str) -> Result<Lookup<Organization>> {
        let data = self.get_organization(login).map_err(SyncError::from)?;
        Ok(Lookup {
            value: data.organization.map(organization_to_core),
            rate_limit: data.rate_limit.map(rate_limit_to_core),
        })
    }

    fn repositories_page(
        &self,
        organization_id: &str,
        cursor: Option<&str>,
        increment: usize,
    ) -> Result<PageResponse<Repository>> {
        let data = self
            .get_organization_repositories(organization_id, cursor, increment)
            .map_err(SyncError::from)?;
        Ok(node_page_to_core(data, repository_to_core))
    }

    fn labels_page(
        &self,
        repository: &Repository,
        cursor: Option<&str>,
        increment: usize,
    ) -> Result<PageResponse<Label>> {
        let data = self
            .get_repository_labels(&repository.id, cursor, increment)
            .map_err(SyncError::from)?;
        Ok(node_page_to_core(data, |l| label_to_core(l, repository)))
    }

    fn mutate(&self, mutation: &LabelMutation) -> Result<()> {
        let outcome = match mutation_from_core(mutation) {
            MutationInput::Create(input) => self.create_label(&input),
            MutationInput::Update(input) => self.update_label(&input),
            MutationInput::Delete(input) => self.delete_label(&input),
        };
        outcome.map_err(SyncError::from)
    }
}
