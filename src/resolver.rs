// ==============================================================================
// resolver.rs - Genotype Resolution
// ==============================================================================
// Description: Turns one vendor export row into one colony import row
// Author: Genotype Importer maintainers
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Algorithm:
//   For each mutation configured for the animal's strain:
//   1. Build one allele per AlleleSpec, in configured order
//      - Fixed spec       → the configured state
//      - Conditional spec → if_positive, flipped when the column lacks '+'
//   2. Stable-sort the alleles so the mutation's leading state comes first
//   3. Join the rendered markers with '/' (e.g., "tg/wt", "wt/wt")
// ==============================================================================

use thiserror::Error;

use crate::allele::{AlleleState, AlleleValue};
use crate::config::{AlleleSpec, AnimalsConfig, MutationConfig, StrainConfig, VendorConfig};
use crate::models::{AnimalRecord, MutationCall, OutputRecord, SAMPLE_COLUMN, STRAIN_COLUMN};

/// Separator between allele markers in a genotype string
pub const GENOTYPE_SEPARATOR: &str = "/";

/// Errors that can occur while resolving a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Row {row}: strain '{strain}' of sample '{sample}' is not in the vendor config")]
    UnknownStrain {
        row: usize,
        sample: String,
        strain: String,
    },

    #[error("Row {row}: column '{column}' required by {context} is missing")]
    MissingColumn {
        row: usize,
        column: String,
        context: String,
    },

    #[error("Row {row}: malformed sample identifier '{sample}': {reason}")]
    MalformedIdentifier {
        row: usize,
        sample: String,
        reason: &'static str,
    },
}

impl ResolveError {
    /// Export row the error refers to
    pub fn row(&self) -> usize {
        match self {
            ResolveError::UnknownStrain { row, .. }
            | ResolveError::MissingColumn { row, .. }
            | ResolveError::MalformedIdentifier { row, .. } => *row,
        }
    }
}

fn missing_column(record: &AnimalRecord, column: &str, context: String) -> ResolveError {
    ResolveError::MissingColumn {
        row: record.row,
        column: column.to_string(),
        context,
    }
}

/// Resolve every allele of `mutation` for one animal, in configured order
///
/// Fixed alleles ignore the record. Conditional alleles read their column and
/// keep `if_positive` only if the raw value contains '+'.
///
/// # Arguments
/// * `mutation` - Mutation whose allele specs are resolved
/// * `record` - Export row holding the presence columns
///
/// # Returns
/// * `Ok(Vec<AlleleValue>)` - One value per configured allele, borrowing the mutation's markers
/// * `Err(ResolveError::MissingColumn)` - A conditional allele's column is absent
pub fn resolve_allele_list<'a>(
    mutation: &'a MutationConfig,
    record: &AnimalRecord,
) -> Result<Vec<AlleleValue<'a>>, ResolveError> {
    mutation
        .alleles
        .iter()
        .map(|spec| -> Result<AlleleValue<'a>, ResolveError> {
            match spec {
                AlleleSpec::Fixed(state) => Ok(AlleleValue::new(*state, &mutation.markers)),
                AlleleSpec::Conditional {
                    column,
                    if_positive,
                } => {
                    let presence = record.get(column).ok_or_else(|| {
                        missing_column(
                            record,
                            column,
                            format!(
                                "mutation '{}' (strain '{}')",
                                mutation.name,
                                record.strain().unwrap_or_default()
                            ),
                        )
                    })?;

                    Ok(AlleleValue::new(*if_positive, &mutation.markers).check_presence(presence))
                }
            }
        })
        .collect()
}

/// Render alleles as a genotype string, `leading` state first
///
/// The sort is stable: alleles of equal state keep their configured order.
///
/// # Examples
/// ```
/// use genotype_importer::allele::{AlleleState, AlleleValue, MarkerPair};
/// use genotype_importer::resolver::render_genotype;
///
/// let markers = MarkerPair::new("mut", "wt");
/// let alleles = vec![
///     AlleleValue::new(AlleleState::WildType, &markers),
///     AlleleValue::new(AlleleState::Mutant, &markers),
/// ];
///
/// assert_eq!(render_genotype(&alleles, AlleleState::Mutant), "mut/wt");
/// assert_eq!(render_genotype(&alleles, AlleleState::WildType), "wt/mut");
/// ```
pub fn render_genotype(alleles: &[AlleleValue<'_>], leading: AlleleState) -> String {
    let mut ordered = alleles.to_vec();
    ordered.sort_by_key(|allele| allele.state() != leading);

    ordered
        .iter()
        .map(|allele| allele.to_marker())
        .collect::<Vec<_>>()
        .join(GENOTYPE_SEPARATOR)
}

/// Resolve and render one mutation for one animal
pub fn resolve_genotype(mutation: &MutationConfig, record: &AnimalRecord) -> Result<String, ResolveError> {
    let alleles = resolve_allele_list(mutation, record)?;
    Ok(render_genotype(&alleles, mutation.leading_marker))
}

/// Resolve every mutation of a strain, in configured order
///
/// # Arguments
/// * `strain` - Strain entry the record belongs to
/// * `record` - Export row holding the presence columns
///
/// # Returns
/// * `Ok(Vec<MutationCall>)` - One call per configured mutation, empty for strains without any
/// * `Err(ResolveError)` - First mutation that failed to resolve
pub fn resolve_mutations(
    strain: &StrainConfig,
    record: &AnimalRecord,
) -> Result<Vec<MutationCall>, ResolveError> {
    strain
        .mutations
        .iter()
        .map(|mutation| -> Result<MutationCall, ResolveError> {
            Ok(MutationCall {
                name: mutation.name.clone(),
                genotype: resolve_genotype(mutation, record)?,
            })
        })
        .collect()
}

/// Build the colony identifier from the sample column
///
/// Takes the first whitespace-delimited token, which must be numeric,
/// left-pads it with zeros to `config.id_zfill` characters and prepends
/// `config.id_prefix`. Longer tokens are never truncated.
///
/// # Arguments
/// * `record` - Export row holding the sample column
/// * `config` - Identifier prefix and padding width
///
/// # Returns
/// * `Ok(String)` - Colony identifier, e.g. `AN0007`
/// * `Err(ResolveError)` - Sample column missing, empty or not numeric
///
/// # Examples
/// ```
/// use genotype_importer::config::AnimalsConfig;
/// use genotype_importer::models::AnimalRecord;
/// use genotype_importer::resolver::resolve_identifier;
///
/// let config = AnimalsConfig { id_prefix: "AN".to_string(), id_zfill: 4 };
/// let record = AnimalRecord::from_pairs(1, vec![("Sample", "7 (litter 2)")]);
///
/// assert_eq!(resolve_identifier(&record, &config).unwrap(), "AN0007");
/// ```
pub fn resolve_identifier(record: &AnimalRecord, config: &AnimalsConfig) -> Result<String, ResolveError> {
    let sample = record
        .sample()
        .ok_or_else(|| missing_column(record, SAMPLE_COLUMN, "the animal identifier".to_string()))?;

    let malformed = |reason| ResolveError::MalformedIdentifier {
        row: record.row,
        sample: sample.to_string(),
        reason,
    };

    let token = sample
        .split_whitespace()
        .next()
        .ok_or_else(|| malformed("sample column is empty"))?;

    if !token.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed("leading token is not a number"));
    }

    Ok(format!(
        "{}{:0>width$}",
        config.id_prefix,
        token,
        width = config.id_zfill
    ))
}

/// Resolve one vendor export row into one colony import row
///
/// # Arguments
/// * `record` - Export row to convert
/// * `vendor` - Vendor strain definitions
/// * `animals` - Identifier settings
///
/// # Returns
/// * `Ok(OutputRecord)` - Identifier, line name and one call per mutation
/// * `Err(ResolveError)` - Bad identifier, unknown strain or missing presence column
pub fn resolve_record(
    record: &AnimalRecord,
    vendor: &VendorConfig,
    animals: &AnimalsConfig,
) -> Result<OutputRecord, ResolveError> {
    let id = resolve_identifier(record, animals)?;

    let strain_name = record
        .strain()
        .ok_or_else(|| missing_column(record, STRAIN_COLUMN, format!("sample '{}'", id)))?;

    let strain = vendor
        .strain(strain_name)
        .ok_or_else(|| ResolveError::UnknownStrain {
            row: record.row,
            sample: record.sample().unwrap_or_default().to_string(),
            strain: strain_name.to_string(),
        })?;

    Ok(OutputRecord {
        id,
        line: strain.display_name.clone(),
        mutations: resolve_mutations(strain, record)?,
    })
}

/// Batch resolve records, one result per record in input order
pub fn resolve_records<'r>(
    records: impl IntoIterator<Item = &'r AnimalRecord>,
    vendor: &VendorConfig,
    animals: &AnimalsConfig,
) -> Vec<Result<OutputRecord, ResolveError>> {
    records
        .into_iter()
        .map(|record| resolve_record(record, vendor, animals))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allele::MarkerPair;

    fn conditional(column: &str, if_positive: AlleleState) -> AlleleSpec {
        AlleleSpec::Conditional {
            column: column.to_string(),
            if_positive,
        }
    }

    fn mutation(alleles: Vec<AlleleSpec>, leading: AlleleState) -> MutationConfig {
        MutationConfig {
            name: "X".to_string(),
            markers: MarkerPair::new("mut", "wt"),
            leading_marker: leading,
            alleles,
        }
    }

    fn animals() -> AnimalsConfig {
        AnimalsConfig {
            id_prefix: "AN".to_string(),
            id_zfill: 4,
        }
    }

    fn vendor() -> VendorConfig {
        let mut vendor = VendorConfig::default();
        vendor.insert(
            "B6-X",
            StrainConfig {
                display_name: "X-line".to_string(),
                mutations: vec![
                    mutation(vec![conditional("FAM", AlleleState::Mutant)], AlleleState::Mutant),
                    MutationConfig {
                        name: "Y".to_string(),
                        markers: MarkerPair::new("ko", "+"),
                        leading_marker: AlleleState::WildType,
                        alleles: vec![
                            conditional("neo", AlleleState::Mutant),
                            conditional("Y-wt", AlleleState::WildType),
                        ],
                    },
                ],
            },
        );
        vendor
    }

    fn record(pairs: Vec<(&str, &str)>) -> AnimalRecord {
        AnimalRecord::from_pairs(1, pairs)
    }

    fn states(alleles: &[AlleleValue<'_>]) -> Vec<AlleleState> {
        alleles.iter().map(|a| a.state()).collect()
    }

    #[test]
    fn test_single_conditional_allele() {
        let config = mutation(vec![conditional("FAM", AlleleState::Mutant)], AlleleState::Mutant);

        assert_eq!(resolve_genotype(&config, &record(vec![("FAM", "+")])).unwrap(), "mut");
        assert_eq!(resolve_genotype(&config, &record(vec![("FAM", "-")])).unwrap(), "wt");
    }

    #[test]
    fn test_heterozygote_mutant_leads() {
        let config = mutation(
            vec![
                conditional("A", AlleleState::Mutant),
                conditional("B", AlleleState::Mutant),
            ],
            AlleleState::Mutant,
        );

        let alleles = resolve_allele_list(&config, &record(vec![("A", "+"), ("B", "-")])).unwrap();
        assert_eq!(states(&alleles), vec![AlleleState::Mutant, AlleleState::WildType]);

        assert_eq!(resolve_genotype(&config, &record(vec![("A", "+"), ("B", "-")])).unwrap(), "mut/wt");
        assert_eq!(resolve_genotype(&config, &record(vec![("A", "-"), ("B", "+")])).unwrap(), "mut/wt");
        assert_eq!(resolve_genotype(&config, &record(vec![("A", "+"), ("B", "+")])).unwrap(), "mut/mut");
        assert_eq!(resolve_genotype(&config, &record(vec![("A", "-"), ("B", "-")])).unwrap(), "wt/wt");
    }

    #[test]
    fn test_wild_type_leading() {
        let config = mutation(
            vec![
                conditional("A", AlleleState::Mutant),
                conditional("B", AlleleState::Mutant),
            ],
            AlleleState::WildType,
        );
        assert_eq!(resolve_genotype(&config, &record(vec![("A", "+"), ("B", "-")])).unwrap(), "wt/mut");
    }

    #[test]
    fn test_fixed_alleles_ignore_record() {
        let config = mutation(
            vec![AlleleSpec::Fixed(AlleleState::WildType), AlleleSpec::Fixed(AlleleState::Mutant)],
            AlleleState::Mutant,
        );

        for animal in [record(vec![]), record(vec![("FAM", "+"), ("A", "-")])] {
            let alleles = resolve_allele_list(&config, &animal).unwrap();
            assert_eq!(states(&alleles), vec![AlleleState::WildType, AlleleState::Mutant]);
        }
    }

    #[test]
    fn test_fixed_and_conditional_mix() {
        // Transgene call: one tested allele plus a fixed wild-type partner
        let config = mutation(
            vec![conditional("Cre", AlleleState::Mutant), AlleleSpec::Fixed(AlleleState::WildType)],
            AlleleState::Mutant,
        );
        assert_eq!(resolve_genotype(&config, &record(vec![("Cre", "Cre+")])).unwrap(), "mut/wt");
        assert_eq!(resolve_genotype(&config, &record(vec![("Cre", "Cre-")])).unwrap(), "wt/wt");
    }

    #[test]
    fn test_wild_type_probe_inverts() {
        let config = mutation(vec![conditional("wt-band", AlleleState::WildType)], AlleleState::Mutant);
        assert_eq!(resolve_genotype(&config, &record(vec![("wt-band", "+")])).unwrap(), "wt");
        assert_eq!(resolve_genotype(&config, &record(vec![("wt-band", "-")])).unwrap(), "mut");
    }

    #[test]
    fn test_genotype_has_one_marker_per_allele() {
        let config = mutation(
            vec![
                conditional("A", AlleleState::Mutant),
                AlleleSpec::Fixed(AlleleState::WildType),
                conditional("B", AlleleState::WildType),
            ],
            AlleleState::Mutant,
        );
        let genotype = resolve_genotype(&config, &record(vec![("A", "+"), ("B", "+")])).unwrap();
        assert_eq!(genotype.split(GENOTYPE_SEPARATOR).count(), 3);
        assert_eq!(genotype, "mut/wt/wt");
    }

    #[test]
    fn test_render_is_stable_for_equal_states() {
        // Distinct marker pairs make the relative order of equal-state alleles observable
        let first = MarkerPair::new("m1", "w1");
        let second = MarkerPair::new("m2", "w2");
        let alleles = vec![
            AlleleValue::new(AlleleState::WildType, &first),
            AlleleValue::new(AlleleState::Mutant, &first),
            AlleleValue::new(AlleleState::WildType, &second),
            AlleleValue::new(AlleleState::Mutant, &second),
        ];

        assert_eq!(render_genotype(&alleles, AlleleState::Mutant), "m1/m2/w1/w2");
        assert_eq!(render_genotype(&alleles, AlleleState::WildType), "w1/w2/m1/m2");
    }

    #[test]
    fn test_render_does_not_reorder_input() {
        let markers = MarkerPair::new("mut", "wt");
        let alleles = vec![
            AlleleValue::new(AlleleState::WildType, &markers),
            AlleleValue::new(AlleleState::Mutant, &markers),
        ];
        render_genotype(&alleles, AlleleState::Mutant);
        assert_eq!(states(&alleles), vec![AlleleState::WildType, AlleleState::Mutant]);
    }

    #[test]
    fn test_render_empty_allele_list() {
        assert_eq!(render_genotype(&[], AlleleState::Mutant), "");
    }

    #[test]
    fn test_missing_column() {
        let config = mutation(vec![conditional("FAM", AlleleState::Mutant)], AlleleState::Mutant);
        let result = resolve_allele_list(&config, &record(vec![("Strain", "B6-X")]));

        match result.unwrap_err() {
            ResolveError::MissingColumn { row, column, context } => {
                assert_eq!(row, 1);
                assert_eq!(column, "FAM");
                assert!(context.contains("'X'"));
                assert!(context.contains("B6-X"));
            }
            other => panic!("Expected MissingColumn error, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_presence_cell_counts_as_absent() {
        let config = mutation(vec![conditional("FAM", AlleleState::Mutant)], AlleleState::Mutant);
        assert_eq!(resolve_genotype(&config, &record(vec![("FAM", "")])).unwrap(), "wt");
    }

    #[test]
    fn test_identifier() {
        let config = animals();
        let id = |sample: &str| resolve_identifier(&record(vec![("Sample", sample)]), &config);

        assert_eq!(id("7 (litter 2)").unwrap(), "AN0007");
        assert_eq!(id("42").unwrap(), "AN0042");
        assert_eq!(id("  12   pup").unwrap(), "AN0012");
        assert_eq!(id("1234").unwrap(), "AN1234");
    }

    #[test]
    fn test_identifier_longer_than_width_is_not_truncated() {
        let id = resolve_identifier(&record(vec![("Sample", "123456 extra")]), &animals()).unwrap();
        assert_eq!(id, "AN123456");
    }

    #[test]
    fn test_identifier_zero_width() {
        let config = AnimalsConfig {
            id_prefix: String::new(),
            id_zfill: 0,
        };
        assert_eq!(resolve_identifier(&record(vec![("Sample", "7")]), &config).unwrap(), "7");
    }

    #[test]
    fn test_malformed_identifier() {
        let config = animals();

        for sample in ["", "   ", "A7 litter", "7b"] {
            let result = resolve_identifier(&record(vec![("Sample", sample)]), &config);
            assert!(
                matches!(result, Err(ResolveError::MalformedIdentifier { .. })),
                "Expected MalformedIdentifier for sample={:?}",
                sample
            );
        }

        let result = resolve_identifier(&record(vec![("Strain", "B6-X")]), &config);
        assert!(matches!(result, Err(ResolveError::MissingColumn { .. })));
    }

    #[test]
    fn test_resolve_record() {
        let animal = record(vec![
            ("Sample", "7 (litter 2)"),
            ("Strain", "B6-X"),
            ("FAM", "+"),
            ("neo", "neo+"),
            ("Y-wt", "+"),
        ]);

        let output = resolve_record(&animal, &vendor(), &animals()).unwrap();
        assert_eq!(output.id, "AN0007");
        assert_eq!(output.line, "X-line");
        assert_eq!(
            output.mutations,
            vec![
                MutationCall {
                    name: "X".to_string(),
                    genotype: "mut".to_string(),
                },
                MutationCall {
                    name: "Y".to_string(),
                    genotype: "+/ko".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_unknown_strain() {
        let animal = record(vec![("Sample", "9"), ("Strain", "BALB/c")]);
        let result = resolve_record(&animal, &vendor(), &animals());

        assert_eq!(
            result.unwrap_err(),
            ResolveError::UnknownStrain {
                row: 1,
                sample: "9".to_string(),
                strain: "BALB/c".to_string(),
            }
        );
    }

    #[test]
    fn test_resolve_records_keeps_order() {
        let records = vec![
            AnimalRecord::from_pairs(1, vec![("Sample", "1"), ("Strain", "B6-X"), ("FAM", "+"), ("neo", "-"), ("Y-wt", "+")]),
            AnimalRecord::from_pairs(2, vec![("Sample", "2"), ("Strain", "nope")]),
            AnimalRecord::from_pairs(3, vec![("Sample", "3"), ("Strain", "B6-X"), ("FAM", "-"), ("neo", "+"), ("Y-wt", "-")]),
        ];

        let results = resolve_records(&records, &vendor(), &animals());
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().id, "AN0001");
        assert_eq!(results[1].as_ref().unwrap_err().row(), 2);

        let third = results[2].as_ref().unwrap();
        assert_eq!(third.id, "AN0003");
        assert_eq!(third.mutations[0].genotype, "wt");
        assert_eq!(third.mutations[1].genotype, "ko/ko");
    }
}
