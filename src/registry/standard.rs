//! Standard OWL view factories.
//!
//! ```text
//! Entity            = Class | Datatype | ObjectProperty | DataProperty
//!                   | AnnotationProperty | NamedIndividual
//! Individual        = NamedIndividual | AnonymousIndividual
//! ClassExpression   = Class | ObjectSomeValuesFrom | ObjectAllValuesFrom
//!                   | DataSomeValuesFrom | ObjectUnionOf | ObjectIntersectionOf
//!                   | ObjectComplementOf | ObjectOneOf
//! ```
//!
//! Strict mode adds punning bans: a named node may not be a class and a
//! datatype at once, nor more than one kind of property. Lax mode drops
//! the bans and also accepts any named node typed by a class as an
//! individual.

use crate::config::Mode;
use crate::factory::filter::{self, FilterExt, FilterRef};
use crate::factory::{CommonFactory, FactoryRef, MultiFactory, finder, maker};
use crate::model::vocab::{self, owl, rdfs};
use crate::view::ViewType;
use super::FactoryRegistry;

/// Types a blank node can carry that make it structure rather than an
/// individual.
const STRUCTURAL_TYPES: &[&str] = &[owl::CLASS, owl::RESTRICTION, owl::AXIOM, vocab::rdf::LIST];

pub fn build(mode: Mode) -> FactoryRegistry {
    let strict = mode == Mode::Strict;
    let ban = |types: &'static [&'static str]| -> FilterRef {
        if strict { filter::banned_types(types) } else { filter::any() }
    };

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    let class = CommonFactory::new(
        ViewType::Class,
        finder::union(vec![finder::fixed(vocab::BUILTIN_CLASSES), finder::by_type(&[owl::CLASS])]),
        filter::all_of(vec![
            filter::is_iri(),
            filter::one_of_iris(vocab::BUILTIN_CLASSES).or(filter::has_type(owl::CLASS)),
            ban(&[rdfs::DATATYPE]),
        ]),
    )
    .with_maker(maker::declaring_named(owl::CLASS))
    .into_ref();

    let datatype = CommonFactory::new(
        ViewType::Datatype,
        finder::union(vec![finder::fixed(vocab::BUILTIN_DATATYPES), finder::by_type(&[rdfs::DATATYPE])]),
        filter::all_of(vec![
            filter::is_iri(),
            filter::one_of_iris(vocab::BUILTIN_DATATYPES).or(filter::has_type(rdfs::DATATYPE)),
            ban(&[owl::CLASS]),
        ]),
    )
    .with_maker(maker::declaring_named(rdfs::DATATYPE))
    .into_ref();

    let object_property = CommonFactory::new(
        ViewType::ObjectProperty,
        finder::by_type(&[owl::OBJECT_PROPERTY]),
        filter::all_of(vec![
            filter::is_iri(),
            filter::has_type(owl::OBJECT_PROPERTY),
            ban(&[owl::DATATYPE_PROPERTY, owl::ANNOTATION_PROPERTY]),
        ]),
    )
    .with_maker(maker::declaring_named(owl::OBJECT_PROPERTY))
    .into_ref();

    let data_property = CommonFactory::new(
        ViewType::DataProperty,
        finder::by_type(&[owl::DATATYPE_PROPERTY]),
        filter::all_of(vec![
            filter::is_iri(),
            filter::has_type(owl::DATATYPE_PROPERTY),
            ban(&[owl::OBJECT_PROPERTY, owl::ANNOTATION_PROPERTY]),
        ]),
    )
    .with_maker(maker::declaring_named(owl::DATATYPE_PROPERTY))
    .into_ref();

    let annotation_property = CommonFactory::new(
        ViewType::AnnotationProperty,
        finder::union(vec![
            finder::fixed(vocab::BUILTIN_ANNOTATION_PROPERTIES),
            finder::by_type(&[owl::ANNOTATION_PROPERTY]),
        ]),
        filter::all_of(vec![
            filter::is_iri(),
            filter::one_of_iris(vocab::BUILTIN_ANNOTATION_PROPERTIES)
                .or(filter::has_type(owl::ANNOTATION_PROPERTY)),
            ban(&[owl::OBJECT_PROPERTY, owl::DATATYPE_PROPERTY]),
        ]),
    )
    .with_maker(maker::declaring_named(owl::ANNOTATION_PROPERTY))
    .into_ref();

    let declared_individual = filter::has_type(owl::NAMED_INDIVIDUAL);
    let named_individual = CommonFactory::new(
        ViewType::NamedIndividual,
        if strict {
            finder::by_type(&[owl::NAMED_INDIVIDUAL])
        } else {
            finder::by_predicate(vocab::rdf::TYPE)
        },
        filter::is_iri().and(if strict {
            declared_individual
        } else {
            declared_individual.or(filter::typed_as(ViewType::Class))
        }),
    )
    .with_maker(maker::declaring_named(owl::NAMED_INDIVIDUAL))
    .into_ref();

    let anonymous_individual = CommonFactory::new(
        ViewType::AnonymousIndividual,
        finder::by_predicate(vocab::rdf::TYPE),
        filter::all_of(vec![
            filter::is_blank(),
            filter::banned_types(STRUCTURAL_TYPES),
            filter::typed_as(ViewType::ClassExpression),
        ]),
    )
    .into_ref();

    let individual = MultiFactory::new(
        ViewType::Individual,
        vec![named_individual.clone(), anonymous_individual.clone()],
    )
    .into_ref();

    let entity = MultiFactory::new(
        ViewType::Entity,
        vec![
            class.clone(),
            datatype.clone(),
            object_property.clone(),
            data_property.clone(),
            annotation_property.clone(),
            named_individual.clone(),
        ],
    )
    .into_ref();

    // ------------------------------------------------------------------
    // Class expressions
    // ------------------------------------------------------------------

    let restriction = |view_type, on: ViewType, filler_predicate: &'static str, filler: ViewType| {
        CommonFactory::new(
            view_type,
            finder::by_type(&[owl::RESTRICTION]),
            filter::all_of(vec![
                filter::is_blank(),
                filter::has_type(owl::RESTRICTION),
                filter::object_as(owl::ON_PROPERTY, on),
                filter::object_as(filler_predicate, filler),
            ]),
        )
        .into_ref()
    };

    let object_some = restriction(
        ViewType::ObjectSomeValuesFrom,
        ViewType::ObjectProperty,
        owl::SOME_VALUES_FROM,
        ViewType::ClassExpression,
    );
    let object_all = restriction(
        ViewType::ObjectAllValuesFrom,
        ViewType::ObjectProperty,
        owl::ALL_VALUES_FROM,
        ViewType::ClassExpression,
    );
    let data_some = restriction(
        ViewType::DataSomeValuesFrom,
        ViewType::DataProperty,
        owl::SOME_VALUES_FROM,
        ViewType::Datatype,
    );

    let anonymous_class = |view_type, predicate: &'static str, component: FilterRef| {
        CommonFactory::new(
            view_type,
            finder::by_predicate(predicate),
            filter::all_of(vec![filter::is_blank(), filter::has_type(owl::CLASS), component]),
        )
        .into_ref()
    };

    let union_of = anonymous_class(
        ViewType::ObjectUnionOf,
        owl::UNION_OF,
        filter::list_of(owl::UNION_OF, ViewType::ClassExpression),
    );
    let intersection_of = anonymous_class(
        ViewType::ObjectIntersectionOf,
        owl::INTERSECTION_OF,
        filter::list_of(owl::INTERSECTION_OF, ViewType::ClassExpression),
    );
    let complement_of = anonymous_class(
        ViewType::ObjectComplementOf,
        owl::COMPLEMENT_OF,
        filter::object_as(owl::COMPLEMENT_OF, ViewType::ClassExpression),
    );
    let one_of = anonymous_class(
        ViewType::ObjectOneOf,
        owl::ONE_OF,
        filter::list_of(owl::ONE_OF, ViewType::Individual),
    );

    let class_expression = MultiFactory::new(
        ViewType::ClassExpression,
        vec![
            class.clone(),
            object_some.clone(),
            object_all.clone(),
            data_some.clone(),
            union_of.clone(),
            intersection_of.clone(),
            complement_of.clone(),
            one_of.clone(),
        ],
    )
    .into_ref();

    let literal: FactoryRef =
        CommonFactory::new(ViewType::Literal, finder::literals(), filter::is_literal()).into_ref();

    FactoryRegistry::builder(mode)
        .register(ViewType::Class, class)
        .register(ViewType::Datatype, datatype)
        .register(ViewType::ObjectProperty, object_property)
        .register(ViewType::DataProperty, data_property)
        .register(ViewType::AnnotationProperty, annotation_property)
        .register(ViewType::NamedIndividual, named_individual)
        .register(ViewType::AnonymousIndividual, anonymous_individual)
        .register(ViewType::Individual, individual)
        .register(ViewType::Entity, entity)
        .register(ViewType::ObjectSomeValuesFrom, object_some)
        .register(ViewType::ObjectAllValuesFrom, object_all)
        .register(ViewType::DataSomeValuesFrom, data_some)
        .register(ViewType::ObjectUnionOf, union_of)
        .register(ViewType::ObjectIntersectionOf, intersection_of)
        .register(ViewType::ObjectComplementOf, complement_of)
        .register(ViewType::ObjectOneOf, one_of)
        .register(ViewType::ClassExpression, class_expression)
        .register(ViewType::Literal, literal)
        .build()
}
