use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::hash::Hash;
use thiserror::Error;

/// Cap on the randomized search for a mutual-pair-free session order.
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("at least 2 groups are required to assign QA duty, got {0}")]
    InsufficientGroups(usize),
}

/// One presentation slot: the presenting group and the groups asking questions.
/// `qa` never contains `presenting`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<G> {
    pub presenting: G,
    pub qa: Vec<G>,
}

/// Result of the session-order search.
///
/// `Found` means the order has no adjacent mutual-QA pair. `BestEffort` means
/// the attempt cap ran out; the last-tested candidate is returned and the
/// caller decides how to surface the warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule<G> {
    Found(Vec<Assignment<G>>),
    BestEffort(Vec<Assignment<G>>),
}

impl<G> Schedule<G> {
    pub fn assignments(&self) -> &[Assignment<G>] {
        match self {
            Schedule::Found(a) | Schedule::BestEffort(a) => a,
        }
    }

    pub fn into_assignments(self) -> Vec<Assignment<G>> {
        match self {
            Schedule::Found(a) | Schedule::BestEffort(a) => a,
        }
    }

    pub fn is_best_effort(&self) -> bool {
        matches!(self, Schedule::BestEffort(_))
    }
}

/// Assigns QA duty for every group using the default attempt cap.
pub fn assign_qa<G, R>(groups: &[G], rng: &mut R) -> Result<Schedule<G>, ScheduleError>
where
    G: Clone + Eq + Hash,
    R: Rng + ?Sized,
{
    assign_qa_with_attempts(groups, rng, DEFAULT_MAX_ATTEMPTS)
}

/// Builds one assignment per group, then searches for a session order with no
/// adjacent mutual-QA pair.
///
/// Each presentation gets one QA group, except that when the group count is
/// odd the last-constructed assignment gets two, so every group serves QA at
/// least once. QA duty always goes to whoever has served least so far.
///
/// Groups must be mutually distinct; duplicates would be scheduled as the
/// same presenter twice.
pub fn assign_qa_with_attempts<G, R>(
    groups: &[G],
    rng: &mut R,
    max_attempts: usize,
) -> Result<Schedule<G>, ScheduleError>
where
    G: Clone + Eq + Hash,
    R: Rng + ?Sized,
{
    if groups.len() < 2 {
        return Err(ScheduleError::InsufficientGroups(groups.len()));
    }

    // Per-call QA-duty counters, seeded to zero for every group.
    let mut frequency: HashMap<G, u32> = groups.iter().map(|g| (g.clone(), 0)).collect();

    let mut shuffled = groups.to_vec();
    shuffled.shuffle(rng);
    let odd_count = groups.len() % 2 != 0;

    let mut assignments = Vec::with_capacity(shuffled.len());
    for (i, presenting) in shuffled.iter().enumerate() {
        let mut eligible: Vec<&G> = shuffled.iter().filter(|g| *g != presenting).collect();

        // The odd remainder lands on the last presenter so nobody would have
        // to QA for themselves.
        let num_qa = if odd_count && i == shuffled.len() - 1 && eligible.len() > 1 {
            2
        } else {
            1
        };

        // Stable sort: ties keep the shuffled order.
        eligible.sort_by_key(|g| frequency[*g]);
        let qa: Vec<G> = eligible.into_iter().take(num_qa).cloned().collect();

        for g in &qa {
            *frequency.entry(g.clone()).or_insert(0) += 1;
        }
        assignments.push(Assignment {
            presenting: presenting.clone(),
            qa,
        });
    }

    // Reshuffle until the order is safe or the cap runs out. With 2 groups a
    // mutual pair is unavoidable, so the cap is the only bound.
    let mut order = assignments;
    order.shuffle(rng);
    let mut attempts = 0;
    while !is_safe_order(&order) && attempts < max_attempts {
        order.shuffle(rng);
        attempts += 1;
    }

    if is_safe_order(&order) {
        Ok(Schedule::Found(order))
    } else {
        Ok(Schedule::BestEffort(order))
    }
}

/// Returns true when no two adjacent sessions are each other's QA group.
/// Vacuously true for 0 or 1 sessions.
pub fn is_safe_order<G: PartialEq>(assignments: &[Assignment<G>]) -> bool {
    assignments.windows(2).all(|pair| {
        !(pair[0].qa.contains(&pair[1].presenting) && pair[1].qa.contains(&pair[0].presenting))
    })
}
