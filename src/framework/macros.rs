//! Declarative association accessors.
//!
//! [`remote_associations!`](crate::remote_associations) turns a compact relation list
//! into the descriptor list for [`ModelType::declare_all`](crate::framework::ModelType::declare_all)
//! plus an accessor trait named `{Owner}Associations` with a typed getter and setter per
//! relation.
//!
//! ```rust,ignore
//! remote_associations! {
//!     impl Car {
//!         has_many wheels: Wheel;
//!         has_one engine: Engine { path: "/engines/by_car/:id" };
//!         belongs_to brand: Brand { foreign_key: "maker_id" };
//!     }
//! }
//!
//! // Generated:
//! // Car::association_descriptors() -> Vec<AssociationDescriptor>
//! // trait CarAssociations, implemented for Car:
//! // car.wheels(&client, reload).await -> Result<Option<Vec<Wheel>>, ResourceError>
//! // car.set_wheels(Vec<Wheel>)
//! // car.engine(&client, reload).await -> Result<Option<Engine>, ResourceError>
//! // car.set_engine(Option<Engine>)
//! ```
//!
//! ## Subtypes
//!
//! A subtype whose [`ModelType`](crate::framework::ModelType) was built with
//! [`ModelType::inherit`](crate::framework::ModelType::inherit) names its ancestors after
//! a colon. It then also implements their accessor traits, and the inherited getters
//! resolve against the subtype's own endpoint:
//!
//! ```rust,ignore
//! remote_associations! {
//!     impl SportsCar: Car {
//!         has_one spoiler: Spoiler;
//!     }
//! }
//!
//! // sports.wheels(&client, false) -> GET /sports_cars/1/wheels
//! ```
//!
//! Deeper hierarchies list every ancestor (`impl Roadster: SportsCar, Car { ... }`).
//!
//! Options inside `{ ... }` are forwarded as builder calls on
//! [`AssociationDescriptor`](crate::framework::AssociationDescriptor) (`path`, `foreign_key`).
//! The owner must implement [`Model`](crate::framework::Model).

#[macro_export]
macro_rules! remote_associations {
    (
        impl $owner:ident $( : $( $parent:ident ),+ $(,)? )? {
            $( $kind:ident $name:ident : $target:ty $( { $( $opt:ident : $value:expr ),* $(,)? } )? ; )*
        }
    ) => {
        impl $owner {
            /// Declared associations of this model.
            pub fn association_descriptors() -> ::std::vec::Vec<$crate::framework::AssociationDescriptor> {
                ::std::vec![
                    $(
                        $crate::framework::AssociationDescriptor::new(
                            ::std::stringify!($name),
                            $crate::remote_associations!(@kind $kind),
                            <$target as $crate::framework::Model>::NAME,
                        ) $( $( .$opt($value) )* )?
                    ),*
                ]
            }
        }

        $crate::paste::paste! {
            /// Typed association accessors generated by `remote_associations!`.
            #[$crate::async_trait::async_trait]
            pub trait [<$owner Associations>]: $crate::framework::Model {
                $(
                    async fn $name(
                        &mut self,
                        client: &$crate::clients::ResourceClient,
                        reload: bool,
                    ) -> ::std::result::Result<
                        ::std::option::Option<$crate::remote_associations!(@value $kind $target)>,
                        $crate::framework::ResourceError,
                    > {
                        let resolver = $crate::framework::Resolver::new(
                            <Self as $crate::framework::Model>::model_type(),
                            client,
                        );
                        let resolved = resolver
                            .get($crate::framework::Model::record_mut(self), ::std::stringify!($name), reload)
                            .await?;
                        ::std::result::Result::Ok($crate::remote_associations!(@read $kind resolved, $target))
                    }

                    fn [<set_ $name>](&mut self, value: $crate::remote_associations!(@input $kind $target)) {
                        $crate::framework::Resolver::set(
                            $crate::framework::Model::record_mut(self),
                            ::std::stringify!($name),
                            $crate::remote_associations!(@wrap $kind value),
                        );
                    }
                )*
            }

            impl [<$owner Associations>] for $owner {}

            $( $( impl [<$parent Associations>] for $owner {} )+ )?
        }
    };

    (@kind has_many) => { $crate::framework::RelationKind::OneToMany };
    (@kind has_one) => { $crate::framework::RelationKind::OneToOne };
    (@kind belongs_to) => { $crate::framework::RelationKind::ManyToOne };

    (@value has_many $target:ty) => { ::std::vec::Vec<$target> };
    (@value $kind:ident $target:ty) => { $target };

    (@input has_many $target:ty) => { ::std::vec::Vec<$target> };
    (@input $kind:ident $target:ty) => { ::std::option::Option<$target> };

    (@read has_many $resolved:ident, $target:ty) => { $resolved.to_many::<$target>() };
    (@read $kind:ident $resolved:ident, $target:ty) => { $resolved.to_one::<$target>() };

    (@wrap has_many $value:ident) => { $crate::framework::Resolved::many($value) };
    (@wrap $kind:ident $value:ident) => { $crate::framework::Resolved::one($value) };
}
