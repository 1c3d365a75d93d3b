use crate::infra::{InMemoryContributorStore, InMemoryEventPublisher};
use clap::Args;
use heritage_admin::error::AppError;
use heritage_admin::workflows::contributors::{
    ActorId, ApplyRequest, ContributorSearch, ContributorWorkflowService, SearchQuery,
    StatusTally, UpdateRequest, UserId, WorkflowError,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Platform user id submitting the demo application
    #[arg(long, default_value_t = 42)]
    pub(crate) user_id: u64,
    /// Admin actor recorded on the review transitions
    #[arg(long, default_value = "admin-demo")]
    pub(crate) admin: String,
    /// Stop after approval instead of exercising suspend/restore
    #[arg(long)]
    pub(crate) skip_suspension: bool,
}

/// Walk one application through the review lifecycle and print what the
/// dashboard would see at each step.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemoryContributorStore::default());
    let events = Arc::new(InMemoryEventPublisher::default());
    store.register_user(args.user_id, "Amara Diallo", "amara@heritage.example");

    let service = ContributorWorkflowService::new(store.clone(), events.clone());
    let admin = ActorId(args.admin.clone());
    let applicant = ActorId(args.user_id.to_string());

    let record = service.apply(
        UserId(args.user_id),
        applicant,
        ApplyRequest {
            bio: "Field archaeologist and survey lead".to_string(),
            expertise: "Ceramics".to_string(),
            documents_url: Some("https://example.org/portfolio.pdf".to_string()),
        },
    )?;
    println!("applied   -> {} ({})", record.id, record.status);

    let mut current = service.approve(&record.id, admin.clone())?;
    println!("approved  -> {} ({})", current.id, current.status);

    if !args.skip_suspension {
        current = service.suspend(&record.id, admin.clone())?;
        println!("suspended -> {} ({})", current.id, current.status);

        current = service.restore(&record.id, admin.clone())?;
        println!("restored  -> {} ({})", current.id, current.status);
    }

    current = service.update(
        &record.id,
        admin,
        UpdateRequest {
            verified: Some(true),
            ..UpdateRequest::default()
        },
    )?;
    println!(
        "updated   -> {} (verified: {}, version: {})",
        current.id, current.verified, current.version
    );

    let tally = StatusTally::new(store.clone())
        .snapshot()
        .map_err(WorkflowError::from)?;
    println!(
        "tally     -> applied {}, active {}, rejected {}, suspended {}, all {}",
        tally.applied, tally.active, tally.rejected, tally.suspended, tally.all
    );

    let page = ContributorSearch::new(store)
        .search(&SearchQuery::default())
        .map_err(|err| match err {
            heritage_admin::workflows::contributors::SearchError::Store(inner) => {
                WorkflowError::from(inner)
            }
            heritage_admin::workflows::contributors::SearchError::Query(inner) => {
                WorkflowError::Validation(inner.to_string())
            }
        })?;
    for item in page.items {
        println!(
            "listing   -> {} {} <{}> [{}]",
            item.id, item.display_name, item.email, item.status
        );
    }

    println!("events    -> {} emitted", events.events().len());
    Ok(())
}
