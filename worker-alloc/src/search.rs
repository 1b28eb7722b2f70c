// Subset search: which candidate slots to staff
//
// The result is defined by exhaustive enumeration: over every subset of
// exactly `k` candidates, take the maximum of
//     (food sufficient, focus score, total yield)
// compared lexicographically. If any subset feeds the city, a sufficient
// one wins; otherwise the best-scoring subset wins and the city goes
// hungry. `brute_force_assignment` is that definition, `best_assignment`
// reaches the same subset by branch-and-bound.
//
// Remaining ties go to the first subset in lexicographic order over the
// candidates ranked by (score desc, total desc, input position).

use std::cmp::Ordering;

use crate::focus::{is_sufficient, score};
use crate::types::{DistributionPreference, SlotId, YieldVector};

/// A chosen subset of candidate slots together with what it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Chosen slots, best-ranked first
    pub slots: Vec<SlotId>,
    pub yields: YieldVector,
    pub score: i32,
    pub sufficient: bool,
}

impl Assignment {
    pub fn empty(food_demand: i32) -> Self {
        let yields = YieldVector::zero();
        Self {
            slots: Vec::new(),
            yields,
            score: 0,
            sufficient: is_sufficient(&yields, food_demand),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, slot: SlotId) -> bool {
        self.slots.contains(&slot)
    }
}

/// One candidate slot with its yield for the city being staffed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub slot: SlotId,
    pub yields: YieldVector,
}

impl Candidate {
    pub fn new(slot: SlotId, yields: YieldVector) -> Self {
        Self { slot, yields }
    }
}

/// Inputs shared by both search strategies
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub workers: usize,
    pub preference: DistributionPreference,
    pub food_demand: i32,
}

// === RANKING ===

#[derive(Debug, Clone, Copy)]
struct Ranked {
    slot: SlotId,
    yields: YieldVector,
    score: i32,
    total: i32,
    food: i32,
}

fn rank_candidates(candidates: &[Candidate], preference: DistributionPreference) -> Vec<Ranked> {
    let mut ranked: Vec<Ranked> = candidates
        .iter()
        .map(|c| Ranked {
            slot: c.slot,
            yields: c.yields,
            score: score(&c.yields, preference),
            total: c.yields.total(),
            food: c.yields.food(),
        })
        .collect();
    // Stable sort keeps input position as the last key
    ranked.sort_by(|a, b| b.score.cmp(&a.score).then(b.total.cmp(&a.total)));
    ranked
}

// === OBJECTIVE ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Objective {
    sufficient: bool,
    score: i32,
    total: i32,
}

impl Objective {
    fn of(yields: &YieldVector, params: &SearchParams) -> Self {
        Self {
            sufficient: is_sufficient(yields, params.food_demand),
            score: score(yields, params.preference),
            total: yields.total(),
        }
    }
}

#[derive(Debug, Clone)]
struct Incumbent {
    objective: Objective,
    picks: Vec<usize>,
    yields: YieldVector,
}

fn into_assignment(ranked: &[Ranked], incumbent: Incumbent) -> Assignment {
    Assignment {
        slots: incumbent.picks.iter().map(|&i| ranked[i].slot).collect(),
        yields: incumbent.yields,
        score: incumbent.objective.score,
        sufficient: incumbent.objective.sufficient,
    }
}

/// Trivial cases shared by both strategies: nothing to choose, or
/// everything has to be chosen.
fn settle_trivial(ranked: &[Ranked], params: &SearchParams) -> Option<Assignment> {
    let k = params.workers.min(ranked.len());
    if k == 0 {
        return Some(Assignment::empty(params.food_demand));
    }
    if k == ranked.len() {
        let picks: Vec<usize> = (0..k).collect();
        let yields = sum_yields(ranked, &picks);
        let incumbent = Incumbent {
            objective: Objective::of(&yields, params),
            picks,
            yields,
        };
        return Some(into_assignment(ranked, incumbent));
    }
    None
}

fn sum_yields(ranked: &[Ranked], picks: &[usize]) -> YieldVector {
    picks
        .iter()
        .fold(YieldVector::zero(), |acc, &i| acc + ranked[i].yields)
}

// === REFERENCE: EXHAUSTIVE ENUMERATION ===

/// Evaluate every size-`k` subset. Exponential; kept as the definition
/// `best_assignment` must agree with.
pub fn brute_force_assignment(candidates: &[Candidate], params: SearchParams) -> Assignment {
    let ranked = rank_candidates(candidates, params.preference);
    if let Some(trivial) = settle_trivial(&ranked, &params) {
        return trivial;
    }

    let n = ranked.len();
    let k = params.workers.min(n);
    let mut picks: Vec<usize> = (0..k).collect();
    let mut best: Option<Incumbent> = None;

    loop {
        let yields = sum_yields(&ranked, &picks);
        let objective = Objective::of(&yields, &params);
        if best.as_ref().is_none_or(|b| objective > b.objective) {
            best = Some(Incumbent {
                objective,
                picks: picks.clone(),
                yields,
            });
        }

        // Advance to the next combination in lexicographic order
        let Some(pos) = (0..k).rev().find(|&i| picks[i] < n - k + i) else {
            break;
        };
        picks[pos] += 1;
        for i in pos + 1..k {
            picks[i] = picks[i - 1] + 1;
        }
    }

    match best {
        Some(best) => into_assignment(&ranked, best),
        None => Assignment::empty(params.food_demand),
    }
}

// === BRANCH AND BOUND ===

/// Best achievable sums when picking `r` more slots from `ranked[i..]`.
/// `food[i][r]` and `total[i][r]` hold the sum of the `r` largest values in
/// the suffix; scores need no table since `ranked` is sorted by score.
struct SuffixBounds {
    food: Vec<Vec<i32>>,
    total: Vec<Vec<i32>>,
    score_prefix: Vec<i32>,
}

impl SuffixBounds {
    fn new(ranked: &[Ranked]) -> Self {
        let top_sums = |values: &mut Vec<i32>| {
            values.sort_unstable_by(|a, b| b.cmp(a));
            let mut sums = Vec::with_capacity(values.len() + 1);
            sums.push(0);
            for v in values.iter() {
                sums.push(sums[sums.len() - 1] + v);
            }
            sums
        };

        let mut food = Vec::with_capacity(ranked.len());
        let mut total = Vec::with_capacity(ranked.len());
        for i in 0..ranked.len() {
            food.push(top_sums(&mut ranked[i..].iter().map(|r| r.food).collect()));
            total.push(top_sums(&mut ranked[i..].iter().map(|r| r.total).collect()));
        }

        let mut score_prefix = Vec::with_capacity(ranked.len() + 1);
        score_prefix.push(0);
        for r in ranked {
            score_prefix.push(score_prefix[score_prefix.len() - 1] + r.score);
        }

        Self {
            food,
            total,
            score_prefix,
        }
    }

    /// Optimistic objective for any completion of `partial` using `remaining`
    /// picks from `ranked[start..]`. Each component is an upper bound, so the
    /// tuple bounds every completion lexicographically.
    fn optimistic(
        &self,
        partial: &YieldVector,
        start: usize,
        remaining: usize,
        params: &SearchParams,
    ) -> Objective {
        let food = partial.food() + self.food[start][remaining];
        Objective {
            sufficient: food >= params.food_demand,
            score: score(partial, params.preference) + self.score_prefix[start + remaining]
                - self.score_prefix[start],
            total: partial.total() + self.total[start][remaining],
        }
    }
}

struct BranchAndBound<'a> {
    ranked: &'a [Ranked],
    bounds: SuffixBounds,
    params: SearchParams,
    k: usize,
    picks: Vec<usize>,
    best: Option<Incumbent>,
    #[cfg_attr(not(feature = "instrument"), allow(dead_code))]
    nodes: u64,
}

impl BranchAndBound<'_> {
    /// Depth-first over combinations in lexicographic order. A branch is
    /// entered only if it could strictly improve on the incumbent, so the
    /// first of several tied subsets is kept, as in the enumeration.
    fn descend(&mut self, start: usize, partial: YieldVector) {
        self.nodes += 1;
        let remaining = self.k - self.picks.len();
        if remaining == 0 {
            let objective = Objective::of(&partial, &self.params);
            if self.best.as_ref().is_none_or(|b| objective > b.objective) {
                self.best = Some(Incumbent {
                    objective,
                    picks: self.picks.clone(),
                    yields: partial,
                });
            }
            return;
        }

        let n = self.ranked.len();
        for i in start..=n - remaining {
            if let Some(best) = &self.best {
                let bound = self.bounds.optimistic(&partial, i, remaining, &self.params);
                if bound.cmp(&best.objective) != Ordering::Greater {
                    // Later starting points only draw from a smaller suffix
                    break;
                }
            }
            self.picks.push(i);
            self.descend(i + 1, partial + self.ranked[i].yields);
            self.picks.pop();
        }
    }
}

/// Staff exactly `min(workers, candidates.len())` slots, maximizing
/// (sufficiency, score, total yield). Agrees with `brute_force_assignment`
/// on every input.
pub fn best_assignment(candidates: &[Candidate], params: SearchParams) -> Assignment {
    let ranked = rank_candidates(candidates, params.preference);
    if let Some(trivial) = settle_trivial(&ranked, &params) {
        return trivial;
    }

    let k = params.workers.min(ranked.len());
    let mut search = BranchAndBound {
        bounds: SuffixBounds::new(&ranked),
        ranked: &ranked,
        params,
        k,
        picks: Vec::with_capacity(k),
        best: None,
        nodes: 0,
    };
    search.descend(0, YieldVector::zero());

    #[cfg(feature = "instrument")]
    tracing::debug!(
        target: "search",
        candidates = ranked.len(),
        workers = k,
        nodes = search.nodes,
    );

    match search.best {
        Some(best) => into_assignment(&ranked, best),
        None => Assignment::empty(params.food_demand),
    }
}
